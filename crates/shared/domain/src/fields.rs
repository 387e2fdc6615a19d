use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One input of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Captcha,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Phone, Self::Captcha];

    /// The input's form name, also used as the submitted parameter name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Captcha => "captcha",
        }
    }

    #[must_use]
    pub const fn flag(self) -> FieldSet {
        match self {
            Self::Name => FieldSet::NAME,
            Self::Email => FieldSet::EMAIL,
            Self::Phone => FieldSet::PHONE,
            Self::Captcha => FieldSet::CAPTCHA,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown field '{s}' (expected name, email, phone or captcha)"))
    }
}

bitflags! {
    /// A set of form fields, e.g. the ones that failed validation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldSet: u8 {
        const NAME = 1 << 0;
        const EMAIL = 1 << 1;
        const PHONE = 1 << 2;
        const CAPTCHA = 1 << 3;
    }
}

impl FieldSet {
    /// Members in form order.
    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |field| self.contains(field.flag()))
    }
}

impl From<Field> for FieldSet {
    fn from(field: Field) -> Self {
        field.flag()
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, field| set | field.flag())
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields().map(Field::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.fields())
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<Field>::deserialize(deserializer)?;
        Ok(fields.into_iter().collect())
    }
}
