use asset_db_types::like::*;

#[test]
fn raw_passes_through() {
    assert_eq!(like_search_term("Apple_%", LikeType::Raw), "Apple_%");
}

#[test]
fn starts_with_appends_wildcard() {
    assert_eq!(like_search_term("someproduct", LikeType::StartsWith), "someproduct%");
}

#[test]
fn ends_with_prepends_wildcard() {
    assert_eq!(like_search_term("product4.dds", LikeType::EndsWith), "%product4.dds");
}

#[test]
fn matches_wraps_term() {
    assert_eq!(like_search_term("product4", LikeType::Matches), "%product4%");
}

#[test]
fn wildcards_in_term_are_escaped() {
    assert_eq!(
        like_search_term("%%blah_", LikeType::Matches),
        "%|%|%blah|_%"
    );
    assert_eq!(escape_like("a|b"), "a||b");
}

#[test]
fn star_paths_become_like_patterns() {
    assert_eq!(wildcard_to_like("*.txt"), "%.txt");
    assert_eq!(wildcard_to_like("dir/*_lod*.fbx"), "dir/%|_lod%.fbx");
}
