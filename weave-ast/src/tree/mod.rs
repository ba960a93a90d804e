pub mod class;
pub mod field;
pub mod method;
pub mod code;
pub mod descriptor;
pub mod annotation;

pub(crate) mod names {
	/// Checks if a class name is valid according to JVMS 4.2.1 (also accepting array class names).
	pub(crate) fn is_valid_class_name(x: &str) -> bool {
		if x.starts_with('[') {
			true
		} else {
			!x.is_empty() && x.split('/').all(is_valid_unqualified_name)
		}
	}

	/// Checks if a name is an unqualified name according to JVMS 4.2.2.
	pub(crate) fn is_valid_unqualified_name(x: &str) -> bool {
		!x.is_empty() && x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/'))
	}

	/// Checks if a method name is valid according to JVMS 4.2.2.
	pub(crate) fn is_valid_method_name(x: &str) -> bool {
		x == "<init>" || x == "<clinit>" || (
			!x.is_empty() && x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/' | '<' | '>'))
		)
	}

}
