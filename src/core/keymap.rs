//! Translation of minified revision-log field names.
//!
//! The vendor log ships two- to six-letter keys (`si`, `ts_bd_i`, ...). The
//! table below gives each a descriptive name; keys it does not know pass
//! through untouched so newer log fields survive a round trip.

use serde_json::{Map, Value};

/// Descriptive name for a minified log key, or the key itself when unmapped.
pub fn remap(key: &str) -> &str {
    match key {
        "ty" => "type",
        "st" => "style_type",
        "s" => "string",
        "ibi" => "ins_index",
        "si" => "start_index",
        "ei" => "end_index",
        "is" => "ins",
        "ds" => "del",
        "as" => "adj_style",
        "sm" => "style_mod",
        "mts" => "multiset",
        "tbs_al" => "table_aln",
        "tbs_of" => "table_off",
        "das_a" => "ds_anchor",
        "hs_nt" => "heading_style_normal_text",
        "ds_pw" => "page_width",
        "ds_ph" => "page_height",
        "ds_mb" => "marg_bottom",
        "ds_ml" => "marg_left",
        "ds_mt" => "marg_top",
        "ds_mr" => "marg_right",
        "lgs_l" => "language",
        "hs_h1" => "head_style1",
        "hs_h2" => "head_style2",
        "hs_h3" => "head_style3",
        "hs_h4" => "head_style4",
        "hs_h5" => "head_style5",
        "hs_h6" => "head_style6",
        "hs_st" => "head_style_st",
        "hs_t" => "head_style_t",
        "sdef_ps" => "set_def_ps",
        "sdef_ts" => "set_def_ts",
        // text style
        "ts_bd" => "bold",
        "ts_bd_i" => "bold_i",
        "ts_bgc" => "background_color",
        "ts_bgc_i" => "background_color_i",
        "ts_ff" => "font_family",
        "ts_ff_i" => "font_family_i",
        "ts_fgc" => "foreground_color",
        "ts_fgc_i" => "foreground_color_i",
        "ts_fs" => "font_size",
        "ts_fs_i" => "font_size_i",
        "ts_it" => "italic",
        "ts_it_i" => "italic_i",
        "ts_sc" => "small_caps",
        "ts_sc_i" => "small_caps_i",
        "ts_st" => "strikethrough",
        "ts_st_i" => "strikethrough_i",
        "ts_un" => "underline",
        "ts_un_i" => "underline_i",
        "ts_va" => "vert_align",
        "ts_va_i" => "vert_align_i",
        // paragraph style
        "ps_al" => "alignment",
        "ps_al_i" => "alignment_i",
        "ps_hd" => "heading_style",
        "ps_hdid" => "heading_id",
        "ps_ifl" => "indent_first_line",
        "ps_ifl_i" => "indent_first_line_i",
        "ps_il" => "indent_line",
        "ps_il_i" => "indent_line_i",
        "ps_ls" => "line_space",
        "ps_ls_i" => "line_space_i",
        "ps_sa" => "space_af_pgraph",
        "ps_sa_i" => "space_af_pgraph_i",
        "ps_sb" => "space_bf_pgraph",
        "ps_sb_i" => "space_bf_pgraph_i",
        "ps_sm" => "ps_style",
        "ps_sm_i" => "ps_style_i",
        // suggestions and elements
        "sugid" => "sug_id",
        "msfd" => "sug_del",
        "usfd" => "undo_sug_del",
        "sas" => "sug_adj_style",
        "rvrt" => "revert",
        "de" => "del_elem",
        "ae" => "add_elem",
        "ue" => "update_elem",
        "te" => "tether_elem",
        "i_ht" => "img_ht",
        "i_wth" => "img_wth",
        "i_src" => "img_src",
        "i_cid" => "img_cosmoId",
        other => other,
    }
}

/// Copy of `map` with every key remapped, nested objects included.
///
/// Insertion order is preserved so the rendered json keeps the vendor's field
/// order.
pub fn rename_keys(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            (
                remap(key).to_string(),
                transform_keys(value, &|k| remap(k).to_string()),
            )
        })
        .collect()
}

/// Rebuilds `value` with `rename` applied to every object key at any depth,
/// including objects held inside arrays.
pub fn transform_keys<F>(value: &Value, rename: &F) -> Value
where
    F: Fn(&str) -> String,
{
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| (rename(key), transform_keys(inner, rename)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| transform_keys(item, rename))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}
