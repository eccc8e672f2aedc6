/// Generate a template `.reconf.toml` for `reconf --init`.
pub fn generate_init_template() -> String {
	r##"# reconf configuration
#
# Recipes run in order over every file below the workspace root.

# Stop looking for .reconf.toml files in parent directories
root = true

# Create a file in every directory matching the pattern, unless it exists.
# The last segment is the file name; directory segments may use `*`,
# `prefix-*` and `**`.
#
# [[recipes]]
# type = "create-files"
# file_pattern = "projects/*/config.yaml"
# contents = """
# apiVersion: v1
# kind: Config
# """

# Change a YAML property in every document whose conditions all hold.
[[recipes]]
type = "change-yaml"
name = "scale deployments"
target = "spec.replicas"
new_value = "3"
conditions = [{ path = "kind", value = "Deployment" }]
# old_value = "1"
# file_pattern = "k8s/**/*.yaml"

# Change an HCL attribute in blocks whose comments mention a marker.
#
# [[recipes]]
# type = "change-hcl"
# attribute = "version"
# new_value = "2.0.$1"
# old_value = '1\.0\.(\d+)'
# regex = true
# comment_conditions = [{ pattern = "# release-channel:", value = "stable" }]
"##
	.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parser::parse_config_str;
	use std::path::Path;

	#[test]
	fn test_template_is_a_valid_config() {
		let config = parse_config_str(&generate_init_template(), Path::new(".reconf.toml")).unwrap();
		assert!(config.root);
		assert_eq!(config.recipes.len(), 1);
	}
}
