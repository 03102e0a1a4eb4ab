mod lock_ext;
pub use lock_ext::*;

mod condvar_ext;
pub use condvar_ext::*;

mod reactive_var;
pub use reactive_var::*;
