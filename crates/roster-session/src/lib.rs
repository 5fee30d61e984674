//! Roster Session - authentication state for the console
//!
//! - `IdentityProvider`: sign-in/sign-out and a pushed session observable
//! - `SessionGate`: Loading / Unauthenticated / Authenticated
//! - `LoginForm`: the operator's login form
//! - `InMemoryIdentityProvider`: configured accounts, no external service

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod gate;
pub mod login;
pub mod memory;
pub mod provider;
pub mod session;

pub use gate::{GateClosed, GateState, SessionGate};
pub use login::{LoginError, LoginForm};
pub use memory::InMemoryIdentityProvider;
pub use provider::{AuthError, AuthStatus, IdentityProvider, SignOutReason};
pub use session::{AccessToken, Account, Session};
