//! Pluggable challenge solver.
//!
//! The solving service is a black box: image in, code or nothing out. Implementations own their
//! own timeout; the runtime never waits on a solver beyond what the solver allows.

use async_trait::async_trait;

#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Reads the code shown in the image at `image_url`. `None` when it cannot.
    async fn solve(&self, image_url: &str) -> Option<String>;
}
