#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.session.dedupe_publications);
        assert_eq!(config.session.event_capacity, 64);
        assert_eq!(config.search.results_per_page, 10);
        assert_eq!(config.search.genes_per_page, 3);
        assert_eq!(config.logging.filter, "tribe=debug,info");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml_str(
            "[session]\ndedupe_publications = false\n",
        )
        .unwrap();
        assert!(!config.session.policy().dedupe_publications);
        assert_eq!(config.session.event_capacity, default_event_capacity());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = Config::from_toml_str("[search]\nresults_per_page = 0\n").unwrap_err();
        assert!(err.to_string().contains("page sizes"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/tribe.toml"))).unwrap_err();
        assert!(err.to_string().starts_with("Config file not found"));
    }

    #[test]
    fn test_show_config_output_round_trips() {
        let mut config = Config::default();
        config.session.dedupe_publications = false;
        config.search.genes_per_page = 5;

        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("[session]"));
        assert!(rendered.contains("filter = \"tribe=debug,info\""));

        let back = Config::from_toml_str(&rendered).unwrap();
        assert!(!back.session.dedupe_publications);
        assert_eq!(back.session.event_capacity, 64);
        assert_eq!(back.search.results_per_page, 10);
        assert_eq!(back.search.genes_per_page, 5);
        assert_eq!(back.logging.filter, config.logging.filter);
    }
}
