/// Generates a `set_<name>` method for a value stored inline in the entry table.
macro_rules! impl_inline_setter {
    ($name:ident, $ty:ty, $variant:ident) => {
        paste::paste! {
            #[doc = "Sets `key` to a `" $ty "` value, creating the property if needed."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = "[`LedgerError::ResourceExhausted`] if a new property needs a slot or"]
            #[doc = "key space that is not available."]
            pub fn [<set_ $name>](&mut self, key: &str, value: $ty) -> Result<(), LedgerError> {
                let idx = self.slot_for(key, 0)?;
                self.table.set_value(idx, PropValue::$variant(value));
                Ok(())
            }
        }
    };
}

/// Generates `set_<name>` methods for values copied into the arena.
macro_rules! impl_arena_setter {
    ($name:ident, $ty:ty, $variant:ident) => {
        paste::paste! {
            #[doc = "Sets `key` to a copy of `value`, creating the property if needed."]
            #[doc = ""]
            #[doc = "Every call copies `value` into fresh arena space, even when the key"]
            #[doc = "already exists."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = "[`LedgerError::ResourceExhausted`] if the table is full or the copy"]
            #[doc = "would cross the arena's midpoint budget. Nothing changes on failure."]
            pub fn [<set_ $name>](&mut self, key: &str, value: $ty) -> Result<(), LedgerError> {
                let data: &[u8] = value.as_ref();
                let idx = self.slot_for(key, data.len())?;
                let span = self.stash(data)?;
                self.table.set_value(idx, PropValue::$variant(span));
                Ok(())
            }
        }
    };
}

/// Generates a read-through `get_<ty>` lookup with a default.
macro_rules! impl_read_through {
    ($ty:ident, $read:ident) => {
        paste::paste! {
            #[doc = "Reads `key` as `" $ty "`, or returns `default` if the record or"]
            #[doc = "key is missing, the value has another type, or it does not fit."]
            pub fn [<get_ $ty>](&mut self, key: &str, default: $ty) -> $ty {
                let mut scratch = [0u8; DEFAULT_PROPERTY_BUFFER_SIZE];
                self.locate(key, &mut scratch)
                    .and_then(|mut decoder| decoder.$read().ok())
                    .and_then(|value| <$ty>::try_from(value).ok())
                    .unwrap_or(default)
            }
        }
    };
}

pub(super) use impl_arena_setter;
pub(super) use impl_inline_setter;
pub(super) use impl_read_through;
