//! Given-When-Then harness for the reservation usecase.

#![allow(clippy::module_name_repetitions)] // BookingTest is the natural name

use carebook_core::error::ReservationError;
use carebook_core::policy::BookingPolicy;
use carebook_core::reservation::{ReservationCommand, ReservationOutcome, ReservationUsecase};
use carebook_core::types::BookableSession;

type OutcomeAssertion = Box<dyn FnOnce(&Result<ReservationOutcome, ReservationError>)>;
type SessionAssertion = Box<dyn FnOnce(&BookableSession)>;

/// Fluent API for testing booking decisions.
///
/// `given_commands` are applied first and must succeed; the `when` command is
/// the one under test. Session invariants are checked after every command.
///
/// # Example
///
/// ```
/// use carebook_testing::{fixtures, BookingTest};
/// use carebook_core::reservation::{CancellationStatus, ReservationCommand, ReservationOutcome};
///
/// BookingTest::new()
///     .given_session(fixtures::session("s", 1).participants(["a"]).waitlist(["b"]).build())
///     .with_policy(fixtures::no_overbooking(5))
///     .when(ReservationCommand::Cancel { user_id: "a".into() })
///     .then_outcome(ReservationOutcome::Cancellation(
///         CancellationStatus::CancelledAndPromoted { promoted: "b".into() },
///     ))
///     .run();
/// ```
pub struct BookingTest {
    usecase: ReservationUsecase,
    policy: Option<BookingPolicy>,
    session: Option<BookableSession>,
    setup: Vec<ReservationCommand>,
    command: Option<ReservationCommand>,
    outcome_assertions: Vec<OutcomeAssertion>,
    session_assertions: Vec<SessionAssertion>,
}

impl Default for BookingTest {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingTest {
    /// Create a new booking test
    #[must_use]
    pub const fn new() -> Self {
        Self {
            usecase: ReservationUsecase::new(),
            policy: None,
            session: None,
            setup: Vec::new(),
            command: None,
            outcome_assertions: Vec::new(),
            session_assertions: Vec::new(),
        }
    }

    /// Set the policy passed to every command
    #[must_use]
    pub fn with_policy(mut self, policy: BookingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Set the initial session (Given)
    #[must_use]
    pub fn given_session(mut self, session: BookableSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Commands applied before the one under test (Given)
    #[must_use]
    pub fn given_commands(mut self, commands: impl IntoIterator<Item = ReservationCommand>) -> Self {
        self.setup.extend(commands);
        self
    }

    /// Set the command to test (When)
    #[must_use]
    pub fn when(mut self, command: ReservationCommand) -> Self {
        self.command = Some(command);
        self
    }

    /// Expect exactly this outcome (Then)
    #[must_use]
    pub fn then_outcome(self, expected: ReservationOutcome) -> Self {
        self.then_result(move |result| {
            assert_eq!(result.as_ref().ok(), Some(&expected), "unexpected outcome: {result:?}");
        })
    }

    /// Expect the command to fail (Then)
    #[must_use]
    pub fn then_error(self) -> Self {
        self.then_result(|result| {
            assert!(result.is_err(), "expected an error, got {result:?}");
        })
    }

    /// Add an assertion about the raw result (Then)
    #[must_use]
    pub fn then_result<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&Result<ReservationOutcome, ReservationError>) + 'static,
    {
        self.outcome_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting session (Then)
    #[must_use]
    pub fn then_session<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&BookableSession) + 'static,
    {
        self.session_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if session, policy or command is not set, if a setup command
    /// fails, if an invariant breaks, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut session = self
            .session
            .expect("Session must be set with given_session()");
        let policy = self.policy.expect("Policy must be set with with_policy()");
        let command = self.command.expect("Command must be set with when()");

        for step in self.setup {
            let description = format!("{step:?}");
            if let Err(error) = self.usecase.execute(step, &mut session, &policy) {
                panic!("setup command {description} failed: {error}");
            }
            assert_invariants(&session);
        }

        let result = self.usecase.execute(command, &mut session, &policy);
        assert_invariants(&session);

        for assertion in self.outcome_assertions {
            assertion(&result);
        }
        for assertion in self.session_assertions {
            assertion(&session);
        }
    }
}

/// Assert that the session satisfies its uniqueness and disjointness rules
///
/// # Panics
///
/// Panics naming the violated invariant.
#[allow(clippy::panic)] // Test assertion
pub fn assert_invariants(session: &BookableSession) {
    if let Err(error) = session.check_invariants() {
        panic!("session invariant violated: {error}");
    }
}
