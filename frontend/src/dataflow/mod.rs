//! Core dataflow primitives for reactive state management
//!
//! These primitives are independent of any particular widget. Drag and property
//! state is held in [`Reactive`] cells; every registration (watchers, DOM
//! listeners) is owned by a [`Subscription`].
//!
//! # Core Components
//!
//! - **[`Reactive`]** - Single-value cell with synchronous change notification
//! - **[`use_state`]** - Cell plus a dedicated [`StateSetter`]
//! - **[`Subscription`]** / **[`SubscriptionSet`]** - Scoped release of registrations

pub mod reactive;
pub mod subscription;

pub use reactive::{Reactive, StateSetter, use_state};
pub use subscription::{Subscription, SubscriptionSet};
