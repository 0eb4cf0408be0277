//! Raw submission payload as it arrives over HTTP.

/// Ordered multimap of text fields.
///
/// Form encodings allow a name to repeat (`alarm[]`), so values are kept in
/// arrival order and `get` returns the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values submitted under `name`, in arrival order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (key, value) in iter {
            fields.push(key, value);
        }
        fields
    }
}

/// A file part received with the submission, held in memory until the
/// report has been committed.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file was sent under (drives before/after classification)
    pub field_name: String,
    /// Client-supplied file name
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Everything a client sent in one submission request.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub fields: FormFields,
    pub files: Vec<UploadedFile>,
}
