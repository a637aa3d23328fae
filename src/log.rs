#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLogEntry {
    /// Absolute byte offset in the input stream.
    pub position: u64,
    pub message: &'static str,
    /// Hex of the bytes around `position`, split by `|` at the position.
    pub context: String,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathElem {
    Index(usize),
    Key(String),
}

/// Collects log entries and, when asked to, the JSON path of the element
/// being decoded. One path slot per open container.
#[derive(Default)]
pub(crate) struct Logger {
    enable: bool,
    entries: Vec<DecodeLogEntry>,
    track_path: bool,
    path: Vec<Option<PathElem>>,
}

impl Logger {
    pub(crate) fn new(enable: bool, track_path: bool) -> Self {
        Self {
            enable,
            entries: Vec::new(),
            track_path: enable && track_path,
            path: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn enabled(&self) -> bool {
        self.enable
    }

    pub(crate) fn log(&mut self, position: u64, message: &'static str, context: String) {
        if self.enable {
            let path = if self.track_path {
                Some(self.path_string())
            } else {
                None
            };
            self.entries.push(DecodeLogEntry {
                position,
                message,
                context,
                path,
            });
        }
    }

    #[inline]
    pub(crate) fn enter(&mut self) {
        if self.track_path {
            self.path.push(None);
        }
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        if self.track_path {
            self.path.pop();
        }
    }

    #[inline]
    pub(crate) fn set_index(&mut self, idx: usize) {
        if self.track_path
            && let Some(slot) = self.path.last_mut()
        {
            *slot = Some(PathElem::Index(idx));
        }
    }

    #[inline]
    pub(crate) fn set_key(&mut self, key: &str) {
        if self.track_path
            && let Some(slot) = self.path.last_mut()
        {
            *slot = Some(PathElem::Key(key.to_string()));
        }
    }

    pub(crate) fn take(&mut self) -> Vec<DecodeLogEntry> {
        std::mem::take(&mut self.entries)
    }

    fn path_string(&self) -> String {
        let mut s = String::from("$");
        for p in self.path.iter().flatten() {
            match p {
                PathElem::Index(i) => {
                    s.push('[');
                    s.push_str(&i.to_string());
                    s.push(']');
                }
                PathElem::Key(k) => {
                    s.push('[');
                    s.push_str(&serde_json::to_string(k).unwrap_or_else(|_| format!("{:?}", k)));
                    s.push(']');
                }
            }
        }
        s
    }
}
