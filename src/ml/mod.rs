// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn training code. The data layer
// touches Burn only through its Dataset/Batcher traits — model
// architecture and optimisation live exclusively here.
//
// What's in this layer:
//
//   model.rs   — The 1-D convolutional regressor
//                reshape → Conv1d → relu → MaxPool1d →
//                Conv1d → relu → AdaptiveAvgPool1d →
//                Linear → relu → Dropout → Linear
//
//   trainer.rs — The per-fold training loop
//                Handles forward pass, MSE loss, backward
//                pass, Adam step, per-epoch metrics and the
//                final held-out evaluation that collects one
//                prediction per test genome
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// 1-D CNN resistance regressor
pub mod model;

/// Per-fold training loop with evaluation and checkpointing
pub mod trainer;
