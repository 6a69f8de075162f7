#![allow(dead_code)]

pub mod budget_alloc;
pub mod layout;
