//! Integration test harness for bundle-depot
//!
//! Every test drives the compiled binary against a local bare git
//! repository serving the index branch.

mod helpers;
mod test_retention;
mod test_update;
