#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy simulation: route following, health and the animation lifecycle.
//!
//! An [`EnemyUnit`] starts in [`EnemyState::Walk`], may enter
//! [`EnemyState::Attack`] when the driver triggers it, and enters
//! [`EnemyState::Death`] as soon as its health is exhausted. Completion of the
//! one-shot animations is reported through polled flags rather than
//! callbacks, so a driver advances every unit once per tick and then reads
//! [`EnemyUnit::is_attack`] and [`EnemyUnit::is_dead`].

mod animation;
mod steering;
mod unit;

pub use animation::{Animation, FrameRect};
pub use steering::{follow_route, Steering};
pub use unit::{EnemyState, EnemyUnit, SpriteState};
