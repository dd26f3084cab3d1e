//! MFA keys: `(module, function, arity)` triples identifying callables.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Uniquely identifies a callable operation.
///
/// The canonical text form is `"Module.function/arity"`, which is also the
/// registry document key. Erlang-style modules keep their leading colon
/// (`":ets.insert/2"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mfa {
    /// Module name
    pub module: String,
    /// Function name
    pub function: String,
    /// Number of parameters
    pub arity: u8,
}

impl Mfa {
    /// Creates an MFA from its parts.
    pub fn new(module: impl Into<String>, function: impl Into<String>, arity: u8) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            arity,
        }
    }
}

impl fmt::Display for Mfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{}", self.module, self.function, self.arity)
    }
}

impl FromStr for Mfa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, arity) = s
            .rsplit_once('/')
            .ok_or_else(|| format!("missing arity in MFA `{s}`"))?;
        let arity: u8 = arity
            .parse()
            .map_err(|_| format!("bad arity in MFA `{s}`"))?;
        let (module, function) = head
            .rsplit_once('.')
            .ok_or_else(|| format!("missing module in MFA `{s}`"))?;
        if module.is_empty() || function.is_empty() {
            return Err(format!("empty component in MFA `{s}`"));
        }
        Ok(Self {
            module: module.to_string(),
            function: function.to_string(),
            arity,
        })
    }
}

impl Serialize for Mfa {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Mfa {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let mfa = Mfa::new("File", "write", 3);
        assert_eq!(mfa.to_string(), "File.write/3");
        assert_eq!("File.write/3".parse::<Mfa>().unwrap(), mfa);
    }

    #[test]
    fn test_dotted_module() {
        let mfa: Mfa = "IO.ANSI.format/1".parse().unwrap();
        assert_eq!(mfa.module, "IO.ANSI");
        assert_eq!(mfa.function, "format");
        assert_eq!(mfa.arity, 1);
    }

    #[test]
    fn test_erlang_module() {
        let mfa: Mfa = ":ets.insert/2".parse().unwrap();
        assert_eq!(mfa.module, ":ets");
        assert_eq!(mfa.function, "insert");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("File.write".parse::<Mfa>().is_err());
        assert!("write/3".parse::<Mfa>().is_err());
        assert!("File.write/x".parse::<Mfa>().is_err());
    }
}
