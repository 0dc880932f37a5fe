//! Auth Relay
//!
//! Manual out-of-band OAuth flow for reading the user's task lists. The client
//! cannot capture the provider redirect, so the user opens the authorization
//! URL in a browser and pastes the code back.
//!
//! ```text
//! NoCache ──hit──────────────────────────────────────────► ListsDisplayed
//!    │miss                                                      ▲
//!    ▼                                                          │
//! AuthUrlRequested ──url──► AwaitingPastedCode ──code──► CodeSubmitted
//!    ▲                                                          │fail
//!    └──────────────retry────────────── Error ◄─────────────────┘
//! ```

pub mod relay;

pub use relay::{AuthRelay, AuthState, RelayError};
