use std::fmt::{Display, Formatter};

/// Opt-in, debug-build-only tracing level for an expression node, mirroring
/// the teacher crate's `Log<T>` (no external logging framework - the teacher
/// never reaches for one, so neither do we).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

impl<T> Log<T> {
    fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl Log<&'static str> {
    #[cfg_attr(not(debug_assertions), allow(unused))]
    pub(crate) fn log_entry(&self) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Verbose("").order() {
            println!("Entering '{}'", self);
        }
    }

    #[cfg_attr(not(debug_assertions), allow(unused))]
    pub(crate) fn log_success(&self, start: usize, end: usize) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Success("").order() {
            println!("[{}]: matched {}..{}", self, start, end);
        }
    }

    #[cfg_attr(not(debug_assertions), allow(unused))]
    pub(crate) fn log_failure(&self, position: usize) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Result("").order() {
            println!("[{}]: no match at {}", self, position);
        }
    }
}
