// ============================================================
// Layer 5 — Resistance CNN
// ============================================================
// A fixed-architecture 1-D CNN mapping a k-mer frequency
// vector to a single unbounded resistance score.
//
// Labels are binary but the objective is squared error, not
// cross-entropy — the model is a regressor whose score is
// thresholded (or ranked) downstream. That modelling choice is
// intentional and preserved as-is.
//
// The AdaptiveAvgPool1d between the conv stack and the dense
// head pools to a fixed length, so the same architecture
// accepts any k-mer order without recomputing flatten sizes.
//
// Reference: Burn Book §3 (Building Blocks)
//            LeCun et al. (1998) Gradient-based learning

use burn::{
    nn::{
        conv::{Conv1d, Conv1dConfig},
        loss::{MseLoss, Reduction},
        pool::{AdaptiveAvgPool1d, AdaptiveAvgPool1dConfig, MaxPool1d, MaxPool1dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig1d,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ResistanceCnnConfig {
    #[config(default = 16)]
    pub conv1_channels: usize,
    #[config(default = 32)]
    pub conv2_channels: usize,
    /// Fixed length the conv output is pooled to before the
    /// dense head — decouples the head from the k-mer order
    #[config(default = 16)]
    pub pooled_len: usize,
    #[config(default = 64)]
    pub hidden_dim: usize,
    #[config(default = 0.2)]
    pub dropout: f64,
}

impl ResistanceCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResistanceCnn<B> {
        let conv1 = Conv1dConfig::new(1, self.conv1_channels, 9)
            .with_stride(4)
            .with_padding(PaddingConfig1d::Explicit(4))
            .init(device);
        let conv2 = Conv1dConfig::new(self.conv1_channels, self.conv2_channels, 5)
            .with_stride(2)
            .with_padding(PaddingConfig1d::Explicit(2))
            .init(device);
        let pool = MaxPool1dConfig::new(4).with_stride(4).init();
        let global_pool = AdaptiveAvgPool1dConfig::new(self.pooled_len).init();
        let fc1 = LinearConfig::new(self.conv2_channels * self.pooled_len, self.hidden_dim)
            .init(device);
        let fc2 = LinearConfig::new(self.hidden_dim, 1).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        ResistanceCnn {
            conv1,
            conv2,
            pool,
            global_pool,
            fc1,
            fc2,
            dropout,
        }
    }
}

#[derive(Module, Debug)]
pub struct ResistanceCnn<B: Backend> {
    pub conv1: Conv1d<B>,
    pub conv2: Conv1d<B>,
    pub pool: MaxPool1d,
    pub global_pool: AdaptiveAvgPool1d,
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> ResistanceCnn<B> {
    /// vectors: [batch, 4^k] → scores: [batch]
    pub fn forward(&self, vectors: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch_size, dim] = vectors.dims();

        // Conv1d wants [batch, channels, length] — one channel in
        let x = vectors.reshape([batch_size, 1, dim]);

        let x = burn::tensor::activation::relu(self.conv1.forward(x));
        let x = self.pool.forward(x);
        let x = burn::tensor::activation::relu(self.conv2.forward(x));
        let x = self.global_pool.forward(x); // [batch, ch2, pooled_len]

        let x = x.flatten::<2>(1, 2); // [batch, ch2 * pooled_len]
        let x = burn::tensor::activation::relu(self.fc1.forward(x));
        let x = self.dropout.forward(x);
        let scores = self.fc2.forward(x); // [batch, 1]

        scores.squeeze(1)
    }

    /// Forward pass plus MSE loss against the 0/1 targets.
    pub fn forward_loss(
        &self,
        vectors: Tensor<B, 2>,
        targets: Tensor<B, 1>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>)
    where
        B: AutodiffBackend,
    {
        let scores = self.forward(vectors);
        let loss = MseLoss::new().forward(scores.clone(), targets, Reduction::Mean);
        (loss, scores)
    }
}
