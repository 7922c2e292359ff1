pub mod rank_biased;

pub use rank_biased::RankBiasedSampler;
