#![deny(warnings)]

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod notice;
pub mod provider;
pub mod service;
#[cfg(test)]
mod testing;
pub mod web;
