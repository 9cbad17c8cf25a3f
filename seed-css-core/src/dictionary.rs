//! The abbreviation dictionary built from blockettes 30-34 and 41-48.
use crate::blockettes::*;

/// An owned index of dictionary blockettes keyed by `lookup_code`.
///
/// The framer owns the dictionary for the lifetime of a volume and clears it
/// when a new volume blockette arrives. Lookups return the first entry with
/// a matching code; codes are unique within a type in well-formed volumes.
#[derive(Debug, Default)]
pub struct Dictionary {
    pub b30: Vec<Blockette30>,
    pub b31: Vec<Blockette31>,
    pub b32: Vec<Blockette32>,
    pub b33: Vec<Blockette33>,
    pub b34: Vec<Blockette34>,
    pub b41: Vec<Blockette41>,
    pub b42: Vec<Blockette42>,
    pub b43: Vec<Blockette43>,
    pub b44: Vec<Blockette44>,
    pub b45: Vec<Blockette45>,
    pub b46: Vec<Blockette46>,
    pub b47: Vec<Blockette47>,
    pub b48: Vec<Blockette48>,
}

impl Dictionary {
    pub fn clear(&mut self) {
        *self = Dictionary::default();
    }

    /// Register a dictionary blockette. Non-dictionary kinds are ignored.
    pub fn add(&mut self, b: &Blockette) {
        match b {
            Blockette::B30(x) => self.b30.push(x.clone()),
            Blockette::B31(x) => self.b31.push(x.clone()),
            Blockette::B32(x) => self.b32.push(x.clone()),
            Blockette::B33(x) => self.b33.push(x.clone()),
            Blockette::B34(x) => self.b34.push(x.clone()),
            Blockette::B41(x) => self.b41.push(x.clone()),
            Blockette::B42(x) => self.b42.push(x.clone()),
            Blockette::B43(x) => self.b43.push(x.clone()),
            Blockette::B44(x) => self.b44.push(x.clone()),
            Blockette::B45(x) => self.b45.push(x.clone()),
            Blockette::B46(x) => self.b46.push(x.clone()),
            Blockette::B47(x) => self.b47.push(x.clone()),
            Blockette::B48(x) => self.b48.push(x.clone()),
            _ => {}
        }
    }

    /// True for blockette kinds [`Dictionary::add`] will register.
    pub fn is_dictionary_blockette(b: &Blockette) -> bool {
        matches!(
            b.kind(),
            Some(30) | Some(31) | Some(32) | Some(33) | Some(34) | Some(41) | Some(42)
                | Some(43) | Some(44) | Some(45) | Some(46) | Some(47) | Some(48)
        )
    }

    pub fn get_b30(&self, lookup_code: i32) -> Option<&Blockette30> {
        self.b30.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b31(&self, lookup_code: i32) -> Option<&Blockette31> {
        self.b31.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b32(&self, lookup_code: i32) -> Option<&Blockette32> {
        self.b32.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b33(&self, lookup_code: i32) -> Option<&Blockette33> {
        self.b33.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b34(&self, lookup_code: i32) -> Option<&Blockette34> {
        self.b34.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b41(&self, lookup_code: i32) -> Option<&Blockette41> {
        self.b41.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b42(&self, lookup_code: i32) -> Option<&Blockette42> {
        self.b42.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b43(&self, lookup_code: i32) -> Option<&Blockette43> {
        self.b43.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b44(&self, lookup_code: i32) -> Option<&Blockette44> {
        self.b44.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b45(&self, lookup_code: i32) -> Option<&Blockette45> {
        self.b45.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b46(&self, lookup_code: i32) -> Option<&Blockette46> {
        self.b46.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b47(&self, lookup_code: i32) -> Option<&Blockette47> {
        self.b47.iter().find(|b| b.lookup_code == lookup_code)
    }

    pub fn get_b48(&self, lookup_code: i32) -> Option<&Blockette48> {
        self.b48.iter().find(|b| b.lookup_code == lookup_code)
    }

    /// Expand a Blockette 60 reference list against the dictionary.
    ///
    /// Each (stage, code) pair is resolved against the response families
    /// 41/43/44/45/46/47/48 in that order; the first match is cloned into
    /// the corresponding station-level blockette (61/53/54/55/56/57/58)
    /// with its `from_bXX` flag set. The flag is informational; downstream
    /// code treats the synthesised response as canonical.
    pub fn expand_b60(&self, b60: &Blockette60) -> Vec<Blockette> {
        let mut expanded = Vec::new();
        for r in &b60.response {
            for &code in &r.code {
                if let Some(b41) = self.get_b41(code) {
                    expanded.push(Blockette::B61(Blockette61::from_b41(r.stage, b41)));
                } else if let Some(b43) = self.get_b43(code) {
                    expanded.push(Blockette::B53(Blockette53::from_b43(r.stage, b43)));
                } else if let Some(b44) = self.get_b44(code) {
                    expanded.push(Blockette::B54(Blockette54::from_b44(r.stage, b44)));
                } else if let Some(b45) = self.get_b45(code) {
                    expanded.push(Blockette::B55(Blockette55::from_b45(r.stage, b45)));
                } else if let Some(b46) = self.get_b46(code) {
                    expanded.push(Blockette::B56(Blockette56::from_b46(r.stage, b46)));
                } else if let Some(b47) = self.get_b47(code) {
                    expanded.push(Blockette::B57(Blockette57::from_b47(r.stage, b47)));
                } else if let Some(b48) = self.get_b48(code) {
                    expanded.push(Blockette::B58(Blockette58::from_b48(r.stage, b48)));
                } else {
                    log::warn!("cannot find dictionary blockette for b60 lookup code {}", code);
                }
            }
        }
        expanded
    }
}
