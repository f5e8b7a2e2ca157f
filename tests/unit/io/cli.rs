//! Tests for command-line parsing and derived run settings

#[cfg(test)]
mod tests {
    use clap::Parser;
    use mosaictile::algorithm::solver::{DuplicatePolicy, SolveStrategy};
    use mosaictile::analysis::descriptor::DescriptorKind;
    use mosaictile::io::cli::Cli;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mosaictile").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    // Verifies defaults match the documented configuration
    // Verified by changing the default grid size
    #[test]
    fn test_defaults() {
        let cli = parse(&["photo.png", "tiles"]);
        let config = cli.run_config();

        assert_eq!(cli.target, PathBuf::from("photo.png"));
        assert_eq!(cli.tiles, PathBuf::from("tiles"));
        assert_eq!(config.scale_factor, 10);
        assert_eq!(config.policy, DuplicatePolicy::NoDuplicates);
        assert_eq!(config.descriptor_kind, DescriptorKind::MeanColor);
        assert_eq!(config.strategy, SolveStrategy::Reduction);
        assert!(cli.should_show_progress());
        assert!(!cli.hd);
    }

    // Verifies the duplicate flags map to the right policy
    // Verified by ignoring the max uses flag
    #[test]
    fn test_policy_flags() {
        assert_eq!(
            parse(&["a.png", "t", "--allow-duplicates"]).policy(),
            DuplicatePolicy::uncapped()
        );
        assert_eq!(
            parse(&["a.png", "t", "-d", "-m", "3"]).policy(),
            DuplicatePolicy::capped(3)
        );
    }

    // Verifies a usage cap without duplicates is rejected
    // Verified by removing the requires constraint
    #[test]
    fn test_max_uses_requires_duplicates() {
        let result =
            Cli::try_parse_from(["mosaictile", "a.png", "t", "--max-uses", "2"]);
        assert!(result.is_err());
    }

    // Verifies descriptor and strategy flags
    // Verified by dropping the grayscale alias
    #[test]
    fn test_feature_and_strategy_flags() {
        let cli = parse(&["a.png", "t", "-f", "grayscale-features", "--optimal", "-g", "20"]);
        let config = cli.run_config();
        assert_eq!(config.descriptor_kind, DescriptorKind::GrayscaleFeatures);
        assert_eq!(config.strategy, SolveStrategy::Optimal);
        assert_eq!(config.scale_factor, 20);

        let alias = parse(&["a.png", "t", "--features", "grayscale"]);
        assert_eq!(alias.features, DescriptorKind::GrayscaleFeatures);
    }

    // Verifies output paths sit next to the target unless overridden
    // Verified by dropping the parent directory from the default path
    #[test]
    fn test_output_paths() {
        let cli = parse(&["shots/photo.jpg", "tiles"]);
        assert_eq!(cli.output_path(), PathBuf::from("shots/photo_mosaic.png"));
        assert_eq!(cli.hd_output_path(), PathBuf::from("shots/photo_mosaic_hd.png"));

        let custom = parse(&["shots/photo.jpg", "tiles", "-o", "out/result.png"]);
        assert_eq!(custom.output_path(), PathBuf::from("out/result.png"));
        assert_eq!(custom.hd_output_path(), PathBuf::from("out/result_hd.png"));
    }

    // Verifies the quiet flag hides progress
    // Verified by inverting should_show_progress
    #[test]
    fn test_quiet() {
        assert!(!parse(&["a.png", "t", "-q"]).should_show_progress());
    }
}
