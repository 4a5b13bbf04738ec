use core::cell::RefCell;

use critical_section::Mutex;

use crate::ledger::LedgerError;

/// Whole-record storage keyed by name.
///
/// This is the only I/O seam: the codec and editor never touch storage on
/// their own. Implementations decide durability and syncing.
pub trait BlobStore {
    /// Copies the record `name` into `buf` and returns its length.
    ///
    /// Returns [`LedgerError::NotFound`] if there is no such record.
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, LedgerError>;

    /// Replaces the record `name` with `data`, creating it if needed.
    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), LedgerError>;
}

impl<S> BlobStore for &mut S
where
    S: BlobStore + ?Sized,
{
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, LedgerError> {
        (**self).read(name, buf)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), LedgerError> {
        (**self).write(name, data)
    }
}

/// A [`BlobStore`] shared by reference, e.g. from a `static`.
///
/// Every access runs inside a critical section. `&SharedBlobStore<S>`
/// implements [`BlobStore`], so several [`Ledger`](crate::ledger::Ledger)
/// handles can use one store.
pub struct SharedBlobStore<S> {
    inner: Mutex<RefCell<S>>,
}

impl<S> SharedBlobStore<S> {
    /// Wraps `store` for shared access.
    pub const fn new(store: S) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(store)),
        }
    }

    /// Runs `f` with exclusive access to the store.
    ///
    /// # Errors
    /// [`LedgerError::FailedPrecondition`] if called again from inside `f`.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R, LedgerError> {
        critical_section::with(|cs| {
            let mut store = self
                .inner
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| LedgerError::FailedPrecondition)?;
            Ok(f(&mut store))
        })
    }

    /// Returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner.into_inner().into_inner()
    }
}

impl<S> BlobStore for &SharedBlobStore<S>
where
    S: BlobStore,
{
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, LedgerError> {
        self.with_store(|store| store.read(name, buf))?
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), LedgerError> {
        self.with_store(|store| store.write(name, data))?
    }
}

impl<S> core::fmt::Debug for SharedBlobStore<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedBlobStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        Ledger, RamBlobStore,
        test_support::{FailingStore, TestStore},
    };

    static SHARED: SharedBlobStore<RamBlobStore<2, 64>> = SharedBlobStore::new(RamBlobStore::new());

    #[test]
    fn mutable_reference_is_a_store() {
        let mut store = TestStore::new();
        {
            let mut ledger = Ledger::new(&mut store, "cfg").unwrap();
            ledger.write(&[0xa0]).unwrap();
        }
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn static_store_serves_several_handles() {
        let mut first = Ledger::new(&SHARED, "first").unwrap();
        let mut second = Ledger::new(&SHARED, "second").unwrap();

        let mut buf = [0u8; 32];
        let mut edit = first.edit(&mut buf).unwrap();
        edit.set_uint("n", 1).unwrap();
        edit.commit().unwrap();

        let mut buf = [0u8; 32];
        let mut edit = second.edit(&mut buf).unwrap();
        edit.set_uint("n", 2).unwrap();
        edit.commit().unwrap();

        assert_eq!(first.get_u64("n", 0), 1);
        assert_eq!(second.get_u64("n", 0), 2);
        assert_eq!(SHARED.with_store(|s| s.record_count()), Ok(2));
    }

    #[test]
    fn reentrant_access_is_refused() {
        let shared = SharedBlobStore::new(TestStore::new());
        let nested = shared.with_store(|_| shared.with_store(|_| ()));
        assert_eq!(nested, Ok(Err(LedgerError::FailedPrecondition)));
    }

    #[test]
    fn errors_pass_through() {
        let shared = SharedBlobStore::new(FailingStore);
        let mut handle = &shared;
        let mut buf = [0u8; 4];
        assert_eq!(
            handle.read("x", &mut buf),
            Err(LedgerError::FailedPrecondition)
        );

        let shared = SharedBlobStore::new(TestStore::new());
        let mut handle = &shared;
        assert_eq!(handle.read("x", &mut buf), Err(LedgerError::NotFound));
        handle.write("x", &[1, 2]).unwrap();
        assert_eq!(handle.read("x", &mut buf), Ok(2));
        assert_eq!(shared.into_inner().record_count(), 1);
    }
}
