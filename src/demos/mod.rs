//! Sample grammars exercising the parser engine end to end. Not part of the
//! public API surface of the core library. Kept here purely as worked
//! examples and as a home for the integration-style tests that accompany
//! them.

pub mod arithmetic;
pub mod hello;
pub mod script;
