use secrecy::{ExposeSecret, SecretString};

/// Field name addressing the first line of an entry.
pub const SECRET_FIELD: &str = "secret";
const PASSWORD_ALIAS: &str = "password";

/// Decrypted contents of one entry: the password on the first line, then
/// `key: value` fields. Any other lines are notes and are not addressable.
pub struct EntryContents {
    secret: SecretString,
    fields: Vec<(String, SecretString)>,
}

impl EntryContents {
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines();
        let secret = SecretString::new(lines.next().unwrap_or_default().to_string());

        let fields = lines
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                let key = key.trim();
                if key.is_empty() || key.contains(char::is_whitespace) {
                    return None;
                }
                Some((key.to_string(), SecretString::new(value.trim().to_string())))
            })
            .collect();

        Self { secret, fields }
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Look up a field by name. `secret` and `password` both address the
    /// first line unless the entry defines a `password:` field of its own.
    pub fn field(&self, name: &str) -> Option<&SecretString> {
        if name == SECRET_FIELD {
            return Some(&self.secret);
        }
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .or_else(|| (name == PASSWORD_ALIAS).then_some(&self.secret))
    }

    pub fn field_names(&self) -> Vec<&str> {
        std::iter::once(SECRET_FIELD)
            .chain(self.fields.iter().map(|(key, _)| key.as_str()))
            .collect()
    }

    /// The URL stored under `url_field`, if any. URLs are not treated as secret.
    pub fn url(&self, url_field: &str) -> Option<String> {
        self.field(url_field)
            .filter(|_| url_field != SECRET_FIELD)
            .map(|value| value.expose_secret().clone())
            .filter(|url| !url.is_empty())
    }
}
