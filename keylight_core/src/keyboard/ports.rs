/// Picks the port to open: the first hardware port, or failing that the first
/// software one. A port is software if its name contains any of
/// `software_ports`.
pub fn preferred_port<S: AsRef<str>>(
	names: &[String],
	software_ports: &[S],
) -> Option<usize> {
	let is_software = |name: &str| {
		software_ports
			.iter()
			.any(|fragment| name.contains(fragment.as_ref()))
	};

	names
		.iter()
		.position(|name| !is_software(name))
		.or_else(|| names.iter().position(|name| is_software(name)))
}
