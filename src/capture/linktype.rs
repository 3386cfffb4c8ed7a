//! Data link types.

use std::fmt;

/// A libpcap data link type (`DLT_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Linktype(pub i32);

macro_rules! linktypes {
    ($($name:ident = $value:literal),* $(,)?) => {
        impl Linktype {
            $(pub const $name: Linktype = Linktype($value);)*

            /// Name without the `DLT_` prefix, for the known types.
            pub fn name(&self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

linktypes! {
    NULL = 0,
    EN10MB = 1,
    IEEE802 = 6,
    ARCNET = 7,
    SLIP = 8,
    PPP = 9,
    FDDI = 10,
    ATM_RFC1483 = 11,
    RAW = 12,
    PPP_SERIAL = 50,
    PPP_ETHER = 51,
    C_HDLC = 104,
    IEEE802_11 = 105,
    LOOP = 108,
    LINUX_SLL = 113,
    LTALK = 114,
}

impl From<i32> for Linktype {
    fn from(value: i32) -> Self {
        Linktype(value)
    }
}

impl fmt::Display for Linktype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "DLT_{}", name),
            None => write!(f, "DLT_{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(Linktype::EN10MB, Linktype(1));
        assert_eq!(Linktype::LINUX_SLL.0, 113);
        assert_eq!(Linktype(105).name(), Some("IEEE802_11"));
        assert_eq!(Linktype(147).name(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Linktype::EN10MB.to_string(), "DLT_EN10MB");
        assert_eq!(Linktype::from(147).to_string(), "DLT_147");
    }
}
