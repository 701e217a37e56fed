use tracing::warn;

/// One selectable option: the label the user sees and picks, and the value
/// it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<V> {
    pub key: String,
    pub value: V,
}

/// Ordered set of options offered at one wizard step.
///
/// Insertion order is presentation order. Keys are unique: a key that
/// collides with an earlier one gets a ` #2`, ` #3`, ... suffix so both
/// entries stay reachable.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceList<V> {
    choices: Vec<Choice<V>>,
}

impl<V> Default for ChoiceList<V> {
    fn default() -> Self {
        Self {
            choices: Vec::new(),
        }
    }
}

impl<V> ChoiceList<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an option and returns the key it was stored under.
    pub fn push(&mut self, key: impl Into<String>, value: V) -> &str {
        let requested = key.into();
        let mut key = requested.clone();
        let mut n = 2;
        while self.contains(&key) {
            key = format!("{} #{}", requested, n);
            n += 1;
        }
        if key != requested {
            warn!(requested = %requested, stored = %key, "Duplicate option label disambiguated");
        }
        self.choices.push(Choice { key, value });
        &self.choices[self.choices.len() - 1].key
    }

    pub fn contains(&self, key: &str) -> bool {
        self.choices.iter().any(|c| c.key == key)
    }

    /// Exact-match lookup of a user's answer.
    pub fn lookup(&self, key: &str) -> Option<&V> {
        self.choices.iter().find(|c| c.key == key).map(|c| &c.value)
    }

    pub fn keys(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ChoiceList<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (key, value) in iter {
            list.push(key, value);
        }
        list
    }
}
