//! HTTP request handlers.

pub(crate) mod pages;
pub(crate) mod ping;
pub(crate) mod toc;
