//! Shared test harness modules for the ramsync CLI.

use super::*;

mod helpers;
mod sync_steps;
