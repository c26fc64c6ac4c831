use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the pair is being sold in a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Sell token0, receive token1.
    Token0ToToken1,
    /// Sell token1, receive token0.
    Token1ToToken0,
}

impl SwapDirection {
    /// The contract's `is_token0` flag: true when token0 is the input side.
    pub fn input_is_token0(self) -> bool {
        matches!(self, Self::Token0ToToken1)
    }

    pub fn from_input_is_token0(is_token0: bool) -> Self {
        if is_token0 {
            Self::Token0ToToken1
        } else {
            Self::Token1ToToken0
        }
    }
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token0ToToken1 => f.write_str("0to1"),
            Self::Token1ToToken0 => f.write_str("1to0"),
        }
    }
}

impl FromStr for SwapDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0to1" | "token0" => Ok(Self::Token0ToToken1),
            "1to0" | "token1" => Ok(Self::Token1ToToken0),
            other => Err(format!("unknown swap direction `{other}`, expected 0to1 or 1to0")),
        }
    }
}
