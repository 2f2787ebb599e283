/// Declares a module `$mod_name` containing an `Id` type whose values are
/// unique for the lifetime of the process.
///
/// ```
/// keylight_utils::unique_id!(widget_id);
///
/// let a = widget_id::Id::unique();
/// let b = widget_id::Id::unique();
/// assert_ne!(a, b);
/// assert!(a < b);
/// ```
#[macro_export]
macro_rules! unique_id {
	($mod_name:ident) => {
		$crate::unique_id!($mod_name: u64);
	};
	($mod_name:ident: u32) => {
		$crate::unique_id!(@impl $mod_name, u32, AtomicU32);
	};
	($mod_name:ident: u64) => {
		$crate::unique_id!(@impl $mod_name, u64, AtomicU64);
	};
	($mod_name:ident: usize) => {
		$crate::unique_id!(@impl $mod_name, usize, AtomicUsize);
	};
	(@impl $mod_name:ident, $ty:ident, $atomic:ident) => {
		pub mod $mod_name {
			static NEXT: ::std::sync::atomic::$atomic = ::std::sync::atomic::$atomic::new(0);

			#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
			pub struct Id($ty);

			impl Id {
				#[must_use]
				pub fn unique() -> Self {
					Self(NEXT.fetch_add(1, ::std::sync::atomic::Ordering::Relaxed))
				}

				#[must_use]
				pub const fn get(self) -> $ty {
					self.0
				}
			}

			impl ::std::fmt::Display for Id {
				fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
					write!(f, "#{}", self.0)
				}
			}
		}
	};
}

#[cfg(test)]
mod tests {
	crate::unique_id!(test_id: u32);

	#[test]
	fn ids_are_distinct_and_increasing() {
		let ids: Vec<_> = (0..16).map(|_| test_id::Id::unique()).collect();

		assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn ids_are_unique_across_threads() {
		let handles: Vec<_> = (0..4)
			.map(|_| {
				std::thread::spawn(|| (0..100).map(|_| test_id::Id::unique()).collect::<Vec<_>>())
			})
			.collect();

		let mut ids: Vec<_> = handles
			.into_iter()
			.flat_map(|handle| handle.join().unwrap())
			.collect();
		let len = ids.len();
		ids.sort();
		ids.dedup();

		assert_eq!(ids.len(), len);
	}
}
