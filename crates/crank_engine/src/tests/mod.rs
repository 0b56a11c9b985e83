//! Whole-game scenarios driven through the headless backend

pub(crate) mod support;

mod lifecycle;
