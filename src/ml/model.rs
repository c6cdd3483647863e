use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::BinaryCrossEntropyLossConfig,
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, Relu,
    },
    prelude::*,
    tensor::activation::sigmoid,
};

/// Output channels of the three convolution stages.
pub const CONV_CHANNELS: [usize; 3] = [16, 32, 16];

/// Smallest input side that still leaves a non-empty feature map.
pub const MIN_IMAGE_SIZE: usize = 22;

/// Side of the feature map after the three conv(3×3, valid) + pool(2×2) stages.
/// 256 → 254 → 127 → 125 → 62 → 60 → 30
pub fn feature_side(image_size: usize) -> usize {
    (0..CONV_CHANNELS.len()).fold(image_size, |side, _| side.saturating_sub(2) / 2)
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct SignalCnnConfig {
    /// Input images are image_size × image_size RGB
    #[config(default = 256)]
    pub image_size: usize,
    /// Width of the hidden dense layer
    #[config(default = 256)]
    pub hidden: usize,
}

impl SignalCnnConfig {
    /// Length of the flattened feature vector fed to the dense layer.
    pub fn flat_features(&self) -> usize {
        let side = feature_side(self.image_size);
        CONV_CHANNELS[2] * side * side
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SignalCnn<B> {
        let [c1, c2, c3] = CONV_CHANNELS;
        SignalCnn {
            conv1: Conv2dConfig::new([3, c1], [3, 3]).init(device),
            conv2: Conv2dConfig::new([c1, c2], [3, 3]).init(device),
            conv3: Conv2dConfig::new([c2, c3], [3, 3]).init(device),
            // Burn defaults pool strides to 1; halve explicitly
            pool:  MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1:   LinearConfig::new(self.flat_features(), self.hidden).init(device),
            fc2:   LinearConfig::new(self.hidden, 1).init(device),
            activation: Relu::new(),
        }
    }
}

/// Conv(16) → Pool → Conv(32) → Pool → Conv(16) → Pool → Flatten
/// → Dense(256, ReLU) → Dense(1) → Sigmoid
#[derive(Module, Debug)]
pub struct SignalCnn<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub conv2:      Conv2d<B>,
    pub conv3:      Conv2d<B>,
    pub pool:       MaxPool2d,
    pub fc1:        Linear<B>,
    pub fc2:        Linear<B>,
    pub activation: Relu,
}

impl<B: Backend> SignalCnn<B> {
    /// images: [batch, 3, S, S] → logits: [batch, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, _, _, _] = images.dims();

        let x = self.pool.forward(self.activation.forward(self.conv1.forward(images)));
        let x = self.pool.forward(self.activation.forward(self.conv2.forward(x)));
        let x = self.pool.forward(self.activation.forward(self.conv3.forward(x)));

        let [_, c, h, w] = x.dims();
        let x = x.reshape([batch_size, c * h * w]);

        let x = self.activation.forward(self.fc1.forward(x));
        self.fc2.forward(x)
    }

    /// images: [batch, 3, S, S] → scores in [0, 1]: [batch, 1]
    pub fn forward_probs(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        sigmoid(self.forward(images))
    }

    /// Binary cross-entropy on the logits plus the sigmoid scores.
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device());
        let loss = bce.forward(logits.clone(), targets);
        (loss, sigmoid(logits))
    }
}
