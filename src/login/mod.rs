//! Simulated BankID login.
//!
//! The flow is a schedule of delayed transitions owned by [`LoginFlow`]. Nothing
//! here sleeps: callers read [`LoginFlow::next_deadline`], wait however their
//! runtime waits, and call [`LoginFlow::poll`]. Because the flow owns the
//! schedule, a wake-up that arrives after a cancel or reset has nothing to fire.

mod clock;
mod driver;

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::SessionIdentity;

pub use clock::{Clock, ManualClock, TokioClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginStep {
    Initial,
    Qr,
    Waiting,
    Success,
}

impl LoginStep {
    pub fn heading(self) -> &'static str {
        match self {
            LoginStep::Initial => "Logga in med BankID",
            LoginStep::Qr => "Öppna BankID-appen",
            LoginStep::Waiting => "Väntar på BankID",
            LoginStep::Success => "Inloggning lyckades!",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            LoginStep::Initial => "Säker inloggning till din fastighetsportal",
            LoginStep::Qr => {
                "Skanna QR-koden med din BankID-app eller använd autostart på samma enhet"
            }
            LoginStep::Waiting => "Slutför identifieringen i BankID-appen",
            LoginStep::Success => "Du omdirigeras till din instrumentpanel...",
        }
    }
}

impl fmt::Display for LoginStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoginStep::Initial => "initial",
            LoginStep::Qr => "qr",
            LoginStep::Waiting => "waiting",
            LoginStep::Success => "success",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    Enter(LoginStep),
    /// Hand the identity to the completion handler. Always last.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub delay: Duration,
    pub effect: TransitionEffect,
}

impl Transition {
    pub const fn enter(delay: Duration, step: LoginStep) -> Self {
        Self {
            delay,
            effect: TransitionEffect::Enter(step),
        }
    }

    pub const fn complete(delay: Duration) -> Self {
        Self {
            delay,
            effect: TransitionEffect::Complete,
        }
    }
}

/// Ordered transitions fired after `start()`, each delay measured from the
/// previous transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSchedule {
    transitions: Vec<Transition>,
}

impl LoginSchedule {
    pub fn new(transitions: Vec<Transition>) -> anyhow::Result<Self> {
        match transitions.split_last() {
            None => anyhow::bail!("Login schedule must contain at least one transition"),
            Some((last, rest)) => {
                if last.effect != TransitionEffect::Complete {
                    anyhow::bail!("Login schedule must end with a completion transition");
                }
                if rest.iter().any(|t| t.effect == TransitionEffect::Complete) {
                    anyhow::bail!("Login schedule may only complete once");
                }
                // Initial and Qr are entered by reset/cancel and start only.
                if let Some(t) = rest.iter().find(|t| {
                    matches!(
                        t.effect,
                        TransitionEffect::Enter(LoginStep::Initial | LoginStep::Qr)
                    )
                }) {
                    anyhow::bail!("Login schedule may not enter {:?}", t.effect);
                }
            }
        }
        Ok(Self { transitions })
    }

    /// qr --1s--> waiting --3s--> success --1s--> callback
    pub fn bankid() -> Self {
        Self {
            transitions: vec![
                Transition::enter(Duration::from_secs(1), LoginStep::Waiting),
                Transition::enter(Duration::from_secs(3), LoginStep::Success),
                Transition::complete(Duration::from_secs(1)),
            ],
        }
    }

    /// Every delay multiplied by `factor`. Fails when a scaled delay is not
    /// a representable `Duration` (negative, NaN or too large).
    pub fn scaled(&self, factor: f64) -> anyhow::Result<Self> {
        let transitions = self
            .transitions
            .iter()
            .map(|t| -> anyhow::Result<Transition> {
                let delay = Duration::try_from_secs_f64(t.delay.as_secs_f64() * factor)
                    .with_context(|| format!("Cannot scale {:?} by {}", t.delay, factor))?;
                Ok(Transition {
                    delay,
                    effect: t.effect,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { transitions })
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn total_delay(&self) -> Duration {
        self.transitions.iter().map(|t| t.delay).sum()
    }
}

impl Default for LoginSchedule {
    fn default() -> Self {
        Self::bankid()
    }
}

/// Opaque reference for one login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderRef(String);

impl OrderRef {
    pub fn generate() -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Self(format!("mock-order-{}-{}", millis, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed person every demo login resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoIdentity {
    pub personal_number: String,
    pub name: String,
}

impl Default for DemoIdentity {
    fn default() -> Self {
        Self {
            personal_number: "198001011234".to_string(),
            name: "Demo User".to_string(),
        }
    }
}

impl DemoIdentity {
    pub fn issue(&self, order_ref: &OrderRef) -> SessionIdentity {
        SessionIdentity {
            personal_number: self.personal_number.clone(),
            name: self.name.clone(),
            order_ref: order_ref.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    StepChanged { from: LoginStep, to: LoginStep },
    Completed(SessionIdentity),
    /// The completion handler failed and the flow went back to `Initial`.
    Reset { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("login already started (step: {0})")]
    AlreadyStarted(LoginStep),
    #[error("login can only be cancelled while the QR code is shown (step: {0})")]
    NotCancellable(LoginStep),
}

pub type CompletionHandler = Box<dyn FnMut(&SessionIdentity) -> anyhow::Result<()> + Send>;

#[derive(Debug)]
struct Attempt {
    order_ref: OrderRef,
    next: usize,
    deadline: Instant,
}

pub struct LoginFlow<C: Clock = TokioClock> {
    clock: C,
    schedule: LoginSchedule,
    identity: DemoIdentity,
    step: LoginStep,
    attempt: Option<Attempt>,
    completed: bool,
    on_complete: Option<CompletionHandler>,
}

impl<C: Clock + fmt::Debug> fmt::Debug for LoginFlow<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFlow")
            .field("clock", &self.clock)
            .field("step", &self.step)
            .field("attempt", &self.attempt)
            .field("completed", &self.completed)
            .finish()
    }
}

impl<C: Clock + Default> Default for LoginFlow<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: Clock> LoginFlow<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            schedule: LoginSchedule::bankid(),
            identity: DemoIdentity::default(),
            step: LoginStep::Initial,
            attempt: None,
            completed: false,
            on_complete: None,
        }
    }

    pub fn with_schedule(mut self, schedule: LoginSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_identity(mut self, identity: DemoIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Called once per successful attempt. An error sends the flow back to
    /// `Initial` instead of completing.
    pub fn with_completion_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&SessionIdentity) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_complete = Some(Box::new(handler));
        self
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn schedule(&self) -> &LoginSchedule {
        &self.schedule
    }

    pub fn order_ref(&self) -> Option<&OrderRef> {
        self.attempt.as_ref().map(|a| &a.order_ref)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.step, LoginStep::Qr | LoginStep::Waiting)
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.attempt.as_ref().map(|a| a.deadline)
    }

    pub fn start(&mut self) -> Result<OrderRef, LoginError> {
        if self.step != LoginStep::Initial || self.attempt.is_some() {
            warn!(step = %self.step, "Ignoring login start, attempt already running");
            return Err(LoginError::AlreadyStarted(self.step));
        }
        let order_ref = OrderRef::generate();
        let first_delay = self
            .schedule
            .transitions
            .first()
            .map(|t| t.delay)
            .unwrap_or_default();
        self.attempt = Some(Attempt {
            order_ref: order_ref.clone(),
            next: 0,
            deadline: self.clock.now() + first_delay,
        });
        self.step = LoginStep::Qr;
        info!(order_ref = %order_ref, "BankID login started");
        Ok(order_ref)
    }

    pub fn cancel(&mut self) -> Result<(), LoginError> {
        if self.step != LoginStep::Qr {
            warn!(step = %self.step, "Ignoring login cancel");
            return Err(LoginError::NotCancellable(self.step));
        }
        if let Some(attempt) = self.attempt.take() {
            info!(order_ref = %attempt.order_ref, "BankID login cancelled");
        }
        self.step = LoginStep::Initial;
        Ok(())
    }

    /// Back to `Initial` from any step, dropping the running attempt.
    pub fn reset(&mut self) {
        self.attempt = None;
        self.completed = false;
        self.step = LoginStep::Initial;
    }

    /// Fire every transition that is due. Deadlines chain from the previous
    /// deadline, so a late poll never stretches the overall schedule.
    pub fn poll(&mut self) -> Vec<LoginEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        while let Some(attempt) = self.attempt.as_mut() {
            if attempt.deadline > now {
                break;
            }
            let Some(transition) = self.schedule.transitions.get(attempt.next).copied() else {
                self.attempt = None;
                break;
            };
            let fired_at = attempt.deadline;
            attempt.next += 1;
            if let Some(following) = self.schedule.transitions.get(attempt.next) {
                attempt.deadline = fired_at + following.delay;
            }

            match transition.effect {
                TransitionEffect::Enter(to) => {
                    let from = self.step;
                    self.step = to;
                    info!(%from, %to, "Login step changed");
                    events.push(LoginEvent::StepChanged { from, to });
                }
                TransitionEffect::Complete => {
                    let Some(finished) = self.attempt.take() else {
                        break;
                    };
                    let identity = self.identity.issue(&finished.order_ref);
                    let outcome = match self.on_complete.as_mut() {
                        Some(handler) => handler(&identity),
                        None => Ok(()),
                    };
                    match outcome {
                        Ok(()) => {
                            self.completed = true;
                            info!(order_ref = %finished.order_ref, "BankID login completed");
                            events.push(LoginEvent::Completed(identity));
                        }
                        Err(e) => {
                            error!(order_ref = %finished.order_ref, "BankID login failed: {:#}", e);
                            self.step = LoginStep::Initial;
                            events.push(LoginEvent::Reset {
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        events
    }
}
