//! Navigation logic for Burrow.
//!
//! [`navigator::PathNavigator`] owns the current location and drives
//! listings; [`history::History`] and [`selection::SelectionModel`] are the
//! state it keeps alongside.

pub mod history;
pub mod navigator;
pub mod selection;
