/// Declares a fieldless enum together with a `VARIANTS` table listing every
/// variant in declaration order, and an `index` accessor into that table.
#[macro_export]
macro_rules! variants {
	(
		$(#[$meta:meta])*
		$vis:vis enum $name:ident {
			$(
				$(#[$field_meta:meta])*
				$variant:ident,
			)+
		}
	) => {
		$(#[$meta])*
		$vis enum $name {
			$(
				$(#[$field_meta])*
				$variant,
			)+
		}

		impl $name {
			pub const VARIANTS: &[Self] = &[$(Self::$variant,)+];

			#[must_use]
			pub fn index(self) -> usize {
				Self::VARIANTS
					.iter()
					.position(|&variant| variant == self)
					.unwrap_or_default()
			}
		}
	};
}
