// SPDX-License-Identifier: MIT OR Apache-2.0
//! One [`crate::Processor`] implementation per stage (§4.5).

pub mod classify;
pub mod extract;
pub mod index;
pub mod store;
pub mod validate;

pub use classify::ClassifyProcessor;
pub use extract::ExtractProcessor;
pub use index::IndexProcessor;
pub use store::StoreProcessor;
pub use validate::ValidateProcessor;
