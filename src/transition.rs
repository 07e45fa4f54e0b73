//! Chromium page transition types.
//!
//! A transition is one core value in the low byte plus a set of qualifier
//! bits in the upper 24 bits, as in `ui/base/page_transition_types.h`.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct PageTransition(pub u32);

impl PageTransition {
    pub const LINK: Self = Self(0);
    pub const TYPED: Self = Self(1);
    pub const AUTO_BOOKMARK: Self = Self(2);
    pub const AUTO_SUBFRAME: Self = Self(3);
    pub const MANUAL_SUBFRAME: Self = Self(4);
    pub const GENERATED: Self = Self(5);
    pub const AUTO_TOPLEVEL: Self = Self(6);
    pub const FORM_SUBMIT: Self = Self(7);
    pub const RELOAD: Self = Self(8);
    pub const KEYWORD: Self = Self(9);
    pub const KEYWORD_GENERATED: Self = Self(10);

    pub const CORE_MASK: u32 = 0xFF;
    pub const QUALIFIER_MASK: u32 = 0xFFFF_FF00;

    pub const FROM_API_3: u32 = 0x0020_0000;
    pub const FROM_API_2: u32 = 0x0040_0000;
    pub const BLOCKED: u32 = 0x0080_0000;
    pub const FORWARD_BACK: u32 = 0x0100_0000;
    pub const FROM_ADDRESS_BAR: u32 = 0x0200_0000;
    pub const HOME_PAGE: u32 = 0x0400_0000;
    pub const FROM_API: u32 = 0x0800_0000;
    pub const CHAIN_START: u32 = 0x1000_0000;
    pub const CHAIN_END: u32 = 0x2000_0000;
    pub const CLIENT_REDIRECT: u32 = 0x4000_0000;
    pub const SERVER_REDIRECT: u32 = 0x8000_0000;
    pub const IS_REDIRECT_MASK: u32 = 0xC000_0000;

    const NAMES: [&'static str; 11] = [
        "link",
        "typed",
        "auto_bookmark",
        "auto_subframe",
        "manual_subframe",
        "generated",
        "auto_toplevel",
        "form_submit",
        "reload",
        "keyword",
        "keyword_generated",
    ];

    /// Core type with all qualifier bits cleared.
    pub fn core(self) -> Self {
        Self(self.0 & Self::CORE_MASK)
    }

    pub fn qualifiers(self) -> u32 {
        self.0 & Self::QUALIFIER_MASK
    }

    pub fn has_qualifier(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub fn is_redirect(self) -> bool {
        self.0 & Self::IS_REDIRECT_MASK != 0
    }

    /// Core type from its snake-case name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(|idx| Self(idx as u32))
    }

    /// Snake-case name of the core type, if it is one Chromium defines.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMES.get(self.core().0 as usize).copied()
    }
}

impl fmt::Display for PageTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "transition_type({})", self.core().0),
        }
    }
}

impl From<u32> for PageTransition {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
