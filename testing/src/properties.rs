//! proptest strategies for booking tests.
//!
//! User ids are drawn from a small pool so generated sequences revisit the
//! same users and exercise the idempotence and promotion paths.

use carebook_core::policy::{BookingPolicy, OverbookingPolicy, WaitlistPolicy};
use carebook_core::reservation::ReservationCommand;
use carebook_core::types::UserId;
use proptest::prelude::*;

/// Size of the user id pool
pub const USER_POOL: usize = 12;

/// One of `USER_POOL` user ids, `u0` through `u11`
pub fn arb_user_id() -> impl Strategy<Value = UserId> {
    (0..USER_POOL).prop_map(|n| UserId::new(format!("u{n}")))
}

/// Valid overbooking policy of any mode
pub fn arb_overbooking_policy() -> impl Strategy<Value = OverbookingPolicy> {
    prop_oneof![
        (0u32..=200).prop_map(OverbookingPolicy::percent),
        (0u32..=4).prop_map(OverbookingPolicy::fixed),
        Just(OverbookingPolicy::disabled()),
    ]
}

/// Valid booking policy with a waitlist bound between 1 and 6
pub fn arb_booking_policy() -> impl Strategy<Value = BookingPolicy> {
    (arb_overbooking_policy(), 1u32..=6)
        .prop_map(|(overbooking, max)| BookingPolicy::new(overbooking, WaitlistPolicy::new(max)))
}

/// Session capacity between 1 and 8
pub fn arb_capacity() -> impl Strategy<Value = u32> {
    1u32..=8
}

/// Book, cancel or leave-waitlist for a pooled user, weighted toward booking
pub fn arb_command() -> impl Strategy<Value = ReservationCommand> {
    prop_oneof![
        3 => arb_user_id().prop_map(|user_id| ReservationCommand::Book { user_id }),
        2 => arb_user_id().prop_map(|user_id| ReservationCommand::Cancel { user_id }),
        1 => arb_user_id().prop_map(|user_id| ReservationCommand::LeaveWaitlist { user_id }),
    ]
}

/// Up to `max_len` commands
pub fn arb_commands(max_len: usize) -> impl Strategy<Value = Vec<ReservationCommand>> {
    prop::collection::vec(arb_command(), 0..=max_len)
}
