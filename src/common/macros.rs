// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------------------------------------
// Config Options

// Declares an option enum that can be passed alone or in an array wherever
// an `IntoArray` of options is expected.
macro_rules! option {
	(
		$(#[$metas:meta])*
		$vis:vis $config_name:ident {
			$(
				$(#[$option_metas:meta])*
				$option_name:ident $(($($tokens:ty),+))?,
			)+
		}
	) => {
		$(#[$metas])*
		$vis enum $config_name {
			$(
				$(#[$option_metas])*
				$option_name $(($($tokens),+))?,
			)+
		}

		impl crate::common::IntoArray<$config_name, 1> for $config_name {
			fn into_array(self) -> [$config_name; 1] {
				[self]
			}
		}
	};
}

// --------------------------------------------------------------------------------
