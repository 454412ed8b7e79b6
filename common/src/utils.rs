/// Searches all ancestor directories of the current working directory
/// (including itself) and of the current executable for a file or directory
/// whose name starts with the given name.
/// If found, returns the path to it with the exact given name joined,
/// so the caller may resolve the extension.
pub fn search_current_ancestor_dirs_for(name: &str) -> Option<std::path::PathBuf> {
    [
        std::env::current_dir().as_ref(),
        std::env::current_exe().as_ref(),
    ]
    .iter()
    .filter_map(|p| p.ok())
    .flat_map(|p| p.ancestors())
    .find(|p| {
        p.read_dir().is_ok_and(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_str().is_some_and(|n| n.starts_with(name)))
        })
    })
    .map(|p| p.join(name))
}

mod comma_sep {
    use core::fmt::{Debug, Display, Formatter, Result};
    use core::iter::IntoIterator;

    /// A wrapper that formats an iterator as a comma-separated list.
    #[derive(Default)]
    pub struct CommaSeparated<I>(core::cell::Cell<Option<I>>);

    macro_rules! fmt_impl {
        ($self:expr, $f:expr, $format:literal) => {
            if let Some(iter) = $self.0.take() {
                let mut iter = iter.into_iter();
                if let Some(first) = iter.next() {
                    write!($f, $format, first)?;
                    for item in iter {
                        write!($f, concat!(", ", $format), item)?;
                    }
                }
            }
        };
    }

    impl<I> Display for CommaSeparated<I>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result {
            fmt_impl!(self, f, "{}");
            Ok(())
        }
    }

    impl<I> Debug for CommaSeparated<I>
    where
        I: IntoIterator,
        I::Item: Debug,
    {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result {
            fmt_impl!(self, f, "{:?}");
            Ok(())
        }
    }

    /// # Remarks
    /// The iterator is consumed by the first formatting, later ones print nothing.
    pub fn comma_separated<I: IntoIterator>(iter: I) -> CommaSeparated<I> {
        CommaSeparated(core::cell::Cell::new(Some(iter)))
    }
}
pub use comma_sep::comma_separated;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated() {
        assert_eq!(comma_separated([1, 2, 3]).to_string(), "1, 2, 3");
        assert_eq!(comma_separated(Vec::<u8>::new()).to_string(), "");
        assert_eq!(format!("{:?}", comma_separated(["a"])), "\"a\"");
    }
}
