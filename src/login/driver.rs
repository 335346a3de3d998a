use crate::login::{LoginEvent, LoginFlow, TokioClock};
use crate::models::SessionIdentity;

impl LoginFlow<TokioClock> {
    /// Sleep on the tokio timer until each deadline and poll, passing every event
    /// to `observer`. Returns the identity, or `None` when the attempt ended
    /// without completing.
    pub async fn run<F>(&mut self, mut observer: F) -> Option<SessionIdentity>
    where
        F: FnMut(&LoginEvent),
    {
        let mut identity = None;
        while let Some(deadline) = self.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            for event in self.poll() {
                observer(&event);
                if let LoginEvent::Completed(who) = event {
                    identity = Some(who);
                }
            }
        }
        identity
    }
}
