// Server-emitted event names. Dashboard clients listen on these exact strings.

pub const LOCUS_DATA: &str = "locus_data";
