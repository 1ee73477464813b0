/// Strip box-score decorations from a team name.
///
/// A trailing win-loss record such as `"Duke (28-5)"` is cut at the `(`.
/// A rank marker such as `"#3 Duke"` is removed by keeping everything after
/// the first space; this runs on the already-truncated name, and a `#`
/// without any space leaves the name unchanged.
pub fn clean_team_name(raw: &str) -> String {
    let mut name = raw;
    if let Some(record_start) = name.find('(') {
        name = name[..record_start].trim();
    }
    if name.contains('#')
        && let Some(rank_end) = name.find(' ')
    {
        name = name[rank_end..].trim();
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::clean_team_name;

    #[test]
    fn strips_rank_and_record() {
        assert_eq!(clean_team_name("#3 Duke (28-5)"), "Duke");
        assert_eq!(clean_team_name("Kansas (15-2)"), "Kansas");
        assert_eq!(clean_team_name("#7 UNC"), "UNC");
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(clean_team_name("Gonzaga"), "Gonzaga");
        assert_eq!(clean_team_name("North Carolina"), "North Carolina");
    }

    #[test]
    fn rank_without_space_is_left_alone() {
        assert_eq!(clean_team_name("#1Houston"), "#1Houston");
    }

    #[test]
    fn multi_word_names_keep_everything_after_rank() {
        assert_eq!(clean_team_name("#12 Saint Mary's (26-7)"), "Saint Mary's");
    }

    #[test]
    fn record_cut_happens_before_rank_rule() {
        // Space only exists ahead of the record, so the rank rule sees "#5".
        assert_eq!(clean_team_name("#5 (20-3)"), "#5");
        assert_eq!(clean_team_name("(28-5)"), "");
    }
}
