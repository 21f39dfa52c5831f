//! JSON patch project file

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::errors::{DeserializeError, PatchFileError, PatchFileErrors, ValueError};
use crate::patch::{Command, Opcode, Patch};

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

#[derive(Deserialize, Clone, Hash, Eq, PartialEq, Debug)]
#[serde(try_from = "String")]
pub struct Name(String);

impl Name {
    pub fn is_valid_name(s: &str) -> bool {
        let mut iter = s.bytes();

        // first character
        match iter.next() {
            // Empty name
            None => return false,
            Some(b) => match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => {}
                _ => return false,
            },
        };

        for b in iter {
            match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' => {}
                _ => return false,
            }
        }

        true
    }

    pub fn try_new(s: String) -> Result<Self, ValueError> {
        if Self::is_valid_name(&s) {
            Ok(Self(s))
        } else {
            Err(ValueError::InvalidName(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Name {
    type Error = ValueError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl FromStr for Name {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s.to_owned())
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `[delay, opcode, parameter]` command entry.
///
/// The opcode may be spelt as its numeric code or its symbolic name.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct CommandEntry(pub u8, pub Opcode, pub i32);

#[derive(Deserialize, Debug)]
pub struct PatchEntry {
    pub name: Name,

    pub commands: Vec<CommandEntry>,

    pub comment: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PatchFile {
    pub patches: Vec<PatchEntry>,
}

pub fn load_patch_file(path: &Path) -> Result<PatchFile, DeserializeError> {
    let file_name = path
        .file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .to_string();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Err(DeserializeError::OpenError(file_name, e)),
    };
    let reader = BufReader::new(file);

    match serde_json::from_reader(reader) {
        Ok(f) => Ok(f),
        Err(e) => Err(DeserializeError::SerdeError(file_name, e)),
    }
}

#[derive(Debug)]
pub struct UniquePatchList {
    list: Vec<(Name, Patch)>,
    map: HashMap<String, usize>,
}

impl UniquePatchList {
    pub fn list(&self) -> &[(Name, Patch)] {
        &self.list
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn get(&self, name: &str) -> Option<&Patch> {
        self.map.get(name).map(|&i| &self.list[i].1)
    }
}

/// Checks patch names are unique and converts every entry into a `Patch`.
pub fn validate_patch_names(patch_file: PatchFile) -> Result<UniquePatchList, PatchFileErrors> {
    let mut errors = Vec::new();

    let mut list = Vec::with_capacity(patch_file.patches.len());
    let mut map = HashMap::with_capacity(patch_file.patches.len());

    for (i, entry) in patch_file.patches.into_iter().enumerate() {
        if map.insert(entry.name.as_str().to_owned(), i).is_some() {
            errors.push(PatchFileError::DuplicateName(
                i,
                entry.name.as_str().to_owned(),
            ));
        }

        let commands = entry
            .commands
            .iter()
            .map(|&CommandEntry(delay, opcode, param)| Command {
                delay,
                opcode,
                param,
            })
            .collect();

        list.push((entry.name, Patch::new(commands)));
    }

    if errors.is_empty() {
        Ok(UniquePatchList { list, map })
    } else {
        Err(PatchFileErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_FILE: &str = r##"{
  "patches": [
    {
      "name": "laser",
      "commands": [
        [0, "ENV_SPEED", -12],
        [0, "PC_PITCH", 90],
        [4, "SLIDE", -30],
        [10, "PATCH_END", 0]
      ]
    },
    {
      "name": "explosion",
      "comment": "LFSR, long decay",
      "commands": [
        [0, 1, 3],
        [0, 0, -4],
        [30, 15, 0]
      ]
    }
  ]
}"##;

    #[test]
    fn parse_example_file() {
        let f: PatchFile = serde_json::from_str(EXAMPLE_FILE).unwrap();
        let patches = validate_patch_names(f).unwrap();

        assert_eq!(patches.len(), 2);

        let laser = patches.get("laser").unwrap();
        assert_eq!(laser.len(), 4);
        assert_eq!(laser.commands()[1].opcode, Opcode::Pitch);
        assert_eq!(laser.commands()[2].param, -30);
        assert!(!laser.is_noise_patch());

        let explosion = patches.get("explosion").unwrap();
        assert!(explosion.is_noise_patch());
        assert_eq!(explosion.commands()[0].opcode, Opcode::NoiseParams);
        assert_eq!(explosion.commands()[2].delay, 30);

        assert!(patches.get("jump").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let f: PatchFile = serde_json::from_str(
            r##"{
  "patches": [
    { "name": "jump", "commands": [[0, 15, 0]] },
    { "name": "jump", "commands": [[0, 15, 0]] }
  ]
}"##,
        )
        .unwrap();

        let e = validate_patch_names(f).unwrap_err();
        assert!(matches!(
            e.0.as_slice(),
            [PatchFileError::DuplicateName(1, _)]
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        assert!(Name::try_new("kick_2".to_owned()).is_ok());
        assert!(Name::try_new("2kick".to_owned()).is_err());
        assert!(Name::try_new("kick drum".to_owned()).is_err());
        assert!(Name::try_new(String::new()).is_err());

        let r = serde_json::from_str::<PatchFile>(
            r##"{ "patches": [ { "name": "bad name", "commands": [] } ] }"##,
        );
        assert!(r.is_err());
    }

    #[test]
    fn unknown_opcodes_are_rejected() {
        let r = serde_json::from_str::<PatchFile>(
            r##"{ "patches": [ { "name": "p", "commands": [[0, "WOBBLE", 1]] } ] }"##,
        );
        assert!(r.is_err());

        let r = serde_json::from_str::<PatchFile>(
            r##"{ "patches": [ { "name": "p", "commands": [[0, 16, 1]] } ] }"##,
        );
        assert!(r.is_err());
    }
}
