#[cfg(test)]
pub mod test {
    #![allow(non_snake_case)]

    use std::path::PathBuf;

    use serde::{Deserialize, Serialize};

    use crate::Settings;
    use crate::schema::{AccessError, Field, FieldValue, Leaf, leaf};

    #[derive(Settings, Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(default)]
    pub struct TestConfig {
        #[config(env = "APP_HOST", arg = "host", short = "H")]
        pub host: String,

        pub port: u16,

        pub debug: bool,

        pub ratio: f64,

        #[config(nested)]
        pub database: Database,

        #[config(nested, env = "STANDBY")]
        pub replica: Option<Database>,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                host: "localhost".into(),
                port: 8080,
                debug: false,
                ratio: 1.0,
                database: Database::default(),
                replica: None,
            }
        }
    }

    #[derive(Settings, Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(default)]
    pub struct Database {
        pub url: Option<String>,

        pub pool_size: usize,
    }

    impl Default for Database {
        fn default() -> Self {
            Self {
                url: None,
                pool_size: 5,
            }
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = TestConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.pool_size, 5);
        assert_eq!(config.replica, None);
    }

    // -- Sequences --------------------------------------------------------------

    #[derive(Settings, Deserialize, Debug, Clone, Default, PartialEq)]
    #[serde(default)]
    pub struct Pool {
        pub name: String,

        #[config(nested)]
        pub members: Vec<Node>,
    }

    #[derive(Settings, Deserialize, Debug, Clone, Default, PartialEq)]
    #[serde(default)]
    pub struct Node {
        pub address: String,
        pub weight: u32,
    }

    #[derive(Settings, Debug, Clone, Default)]
    pub struct Cluster {
        #[config(nested)]
        pub leader: Box<Node>,

        #[config(nested)]
        pub replicas: [Node; 2],
    }

    // -- Deep nesting with non-Rust field names ---------------------------------

    #[derive(Settings, Debug, Clone, Default)]
    pub struct Deep {
        #[config(nested)]
        pub Outer: Outer,
    }

    #[derive(Settings, Debug, Clone, Default)]
    pub struct Outer {
        #[config(nested)]
        pub Inner: Inner,
    }

    #[derive(Settings, Debug, Clone, Default)]
    pub struct Inner {
        pub logLevel: String,
    }

    // -- Schema shape edge cases ------------------------------------------------

    #[derive(Settings, Debug, Clone, Default)]
    pub struct Cyclic {
        pub name: String,

        #[config(nested)]
        pub next: Option<Box<Cyclic>>,
    }

    #[derive(Settings, Deserialize, Debug, Clone, Default)]
    #[serde(default)]
    pub struct Twins {
        #[config(nested)]
        pub primary: Endpoint,

        #[config(nested)]
        pub secondary: Endpoint,
    }

    #[derive(Settings, Deserialize, Debug, Clone, Default)]
    #[serde(default)]
    pub struct Endpoint {
        pub url: String,
    }

    #[derive(Settings, Debug, Clone, Default)]
    pub struct Skipping {
        pub r#type: String,

        #[config(skip)]
        pub cache: Vec<u8>,

        pub level: i32,
    }

    #[test]
    fn derive_strips_raw_identifiers_and_skips_fields() {
        let names: Vec<&str> = Skipping::FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names, ["type", "level"]);

        let mut value = Skipping::default();
        value
            .set_path(&[1], FieldValue::Int(-3))
            .unwrap();
        assert_eq!(value.level, -3);
    }

    #[test]
    fn derive_records_raw_tags() {
        let host = &TestConfig::FIELDS[0];
        assert_eq!(
            host.tags,
            [("env", "APP_HOST"), ("arg", "host"), ("short", "H")]
        );
        let replica = &TestConfig::FIELDS[5];
        assert_eq!(replica.tags, [("env", "STANDBY")]);
    }

    // -- Command-line fixtures --------------------------------------------------

    #[derive(Settings, Debug, Clone, Default, PartialEq)]
    pub struct Flags {
        #[config(arg = "x", short = "y")]
        pub value: String,

        #[config(arg = "count")]
        pub count: u32,

        #[config(arg = "offset")]
        pub offset: i64,

        #[config(arg = "verbose", short = "v")]
        pub verbose: bool,

        #[config(arg = "scale")]
        pub scale: f32,

        pub label: String,

        #[config(nested)]
        pub tls: Option<Tls>,
    }

    #[derive(Settings, Debug, Clone, Default, PartialEq)]
    pub struct Tls {
        #[config(arg = "cert")]
        pub cert: PathBuf,
    }

    #[derive(Settings, Debug, Clone, Default)]
    pub struct Clash {
        #[config(arg = "name")]
        pub a: String,

        #[config(arg = "name")]
        pub b: u32,
    }

    /// Written by hand: the derive would reject the flag name at compile time.
    #[derive(Debug, Clone, Default)]
    pub struct BadFlag {
        pub name: String,
    }

    impl Settings for BadFlag {
        const FIELDS: &'static [Field] = &[Field {
            name: "name",
            tags: &[("arg", "-x")],
            shape: leaf::<String>,
        }];

        fn set_path(&mut self, path: &[usize], value: FieldValue) -> Result<(), AccessError> {
            match path {
                [0] => self.name.assign(value).map_err(Into::into),
                _ => Err(AccessError::NotALeaf),
            }
        }
    }
}
