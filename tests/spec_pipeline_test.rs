//! End-to-end tests: JSON plot specifications through assembly to SVG.
//!
//! Run: cargo test --test spec_pipeline_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use gogviz::config::parse_plot_spec;
use gogviz::grammar::stat::vars;
use gogviz::legend::LegendInfo;
use gogviz::prelude::*;
use gogviz::tooltip::HitShape;

fn build(spec: &str) -> BuiltPlot {
    parse_plot_spec(spec).unwrap().assembler().unwrap().build().unwrap()
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_json_to_svg_file() {
    let plot = build(
        "{'data': {'x': [1, 2, 3], 'y': [3, 1, 2]},
          'mapping': {'x': 'x', 'y': 'y'},
          'layers': [{'geom': 'line'}, {'geom': 'point', 'size': 4}],
          'title': 'Trend',
          'size': {'width': 320, 'height': 240}}",
    );
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trend.svg");
    plot.write_svg(&path).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(r#"width="320""#));
    assert!(svg.contains("Trend"));
    assert_eq!(svg, plot.to_svg());
}

#[test]
fn test_resize_relayouts_scene() {
    let mut plot = build(
        "{'data': {'x': [1, 2], 'y': [1, 2]}, 'mapping': {'x': 'x', 'y': 'y'}, 'layers': [{'geom': 'point'}]}",
    );
    let before = plot.panels()[0];
    plot.set_dimensions(1600, 1200);
    let after = plot.panels()[0];
    assert_eq!((plot.width(), plot.height()), (1600, 1200));
    assert!(after.width > before.width);
    assert!(plot.to_svg().contains(r#"width="1600""#));
}

// ============================================================================
// Stats
// ============================================================================

#[test]
fn test_json_to_svg_summary() {
    let plot = build(
        "{'data': {'g': ['a', 'a', 'b', 'b', 'b'], 'v': [1, 3, 10, 20, 30]},
          'mapping': {'x': 'g', 'y': 'v'},
          'layers': [{'geom': 'pointrange', 'stat': 'summary', 'fun': 'median', 'fun_min': 'min', 'fun_max': 'max'}]}",
    );
    let points = plot.layers()[0].layers()[0].aesthetics().points();
    assert_eq!(points.len(), 2);
    assert_relative_eq!(points[0].y().unwrap(), 2.0);
    assert_relative_eq!(points[1].y().unwrap(), 20.0);
    assert_relative_eq!(points[1].number(Aes::YMin).unwrap(), 10.0);
    assert_relative_eq!(points[1].number(Aes::YMax).unwrap(), 30.0);
}

#[test]
fn test_histogram_counts_every_row() {
    let plot = build(
        "{'data': {'v': [1, 2, 2, 3, 3, 3, 4, 4, 4, 4]},
          'mapping': {'x': 'v'},
          'layers': [{'geom': 'histogram', 'bins': 4}]}",
    );
    let data = plot.layers()[0].layers()[0].data();
    let total: f64 = data.numeric(&vars::COUNT).unwrap().iter().flatten().sum();
    assert_relative_eq!(total, 10.0);
    assert_eq!(plot.y_domain().lower().min(0.0), plot.y_domain().lower());
}

#[test]
fn test_correlation_matrix_colorbar() {
    let plot = build(
        "{'data': {'a': [1, 2, 3, 4], 'b': [2, 4, 6, 8], 'c': [4, 3, 2, 1]},
          'layers': [{'geom': 'point', 'stat': 'corr', 'type': 'full', 'mapping': {'color': '..corr..'}}]}",
    );
    let data = plot.layers()[0].layers()[0].data();
    let corr: Vec<f64> = data.numeric(&vars::CORR).unwrap().iter().flatten().copied().collect();
    assert_eq!(corr.len(), 9);
    assert!(corr.iter().all(|c| (-1.0 - 1e-9..=1.0 + 1e-9).contains(c)));
    assert!(matches!(plot.legends()[0], LegendInfo::ColorBar(_)));
}

// ============================================================================
// Scales, legends and facets
// ============================================================================

#[test]
fn test_discrete_fill_single_legend() {
    let plot = build(
        "{'data': {'x': ['p', 'q', 'p', 'q'], 'y': [1, 2, 3, 4], 'k': ['u', 'u', 'w', 'w']},
          'mapping': {'x': 'x', 'y': 'y', 'fill': 'k'},
          'layers': [{'geom': 'bar', 'stat': 'identity', 'position': 'dodge'}],
          'guides': {'fill': {'name': 'legend', 'ncol': 2}}}",
    );
    assert_eq!(plot.legends().len(), 1);
    match &plot.legends()[0] {
        LegendInfo::Legend(l) => assert_eq!(l.title(), "k"),
        LegendInfo::ColorBar(_) => panic!("expected a discrete legend"),
    }
    assert_eq!(plot.scale(Aes::X).unwrap().scale_breaks().labels(), ["p", "q"]);
}

#[test]
fn test_legend_position_none() {
    let plot = build(
        "{'data': {'x': [1, 2], 'y': [1, 2], 'k': ['a', 'b']},
          'mapping': {'x': 'x', 'y': 'y', 'color': 'k'},
          'layers': [{'geom': 'point'}],
          'theme': {'name': 'bw', 'legend_position': 'none'}}",
    );
    assert!(plot.legends().is_empty());
}

#[test]
fn test_facet_grid_panels() {
    let plot = build(
        "{'data': {'x': [1, 2, 3, 4, 5, 6], 'y': [1, 2, 3, 4, 5, 6], 'f': ['a', 'b', 'c', 'a', 'b', 'c']},
          'mapping': {'x': 'x', 'y': 'y'},
          'layers': [{'geom': 'point'}],
          'facet': {'name': 'grid', 'x': 'f'}}",
    );
    assert_eq!(plot.panels().len(), 3);
    assert_eq!(plot.facet().cols, 3);
    let rows: usize = plot.layers()[0].layers().iter().map(|l| l.data().row_count()).sum();
    assert_eq!(rows, 6);
}

#[test]
fn test_flipped_coordinates() {
    let plot = build(
        "{'data': {'x': [0, 10], 'y': [0, 100]},
          'mapping': {'x': 'x', 'y': 'y'},
          'layers': [{'geom': 'point'}],
          'coord': {'name': 'flip'}}",
    );
    let uppers = [plot.x_domain().upper(), plot.y_domain().upper()];
    assert!(uppers.iter().any(|u| *u >= 100.0));
    assert!(uppers.iter().all(|u| *u >= 10.0));
    assert!(plot.scene().find("axis-title-left").is_some());
}

// ============================================================================
// Tooltips
// ============================================================================

#[test]
fn test_tooltip_at_point_target() {
    let plot = build(
        "{'data': {'x': [1, 2, 3], 'y': [5, 6, 7]},
          'mapping': {'x': 'x', 'y': 'y'},
          'layers': [{'geom': 'point', 'tooltips': {'lines': ['value|@y']}}]}",
    );
    let target = &plot.targets(0, 0)[1];
    let HitShape::Point { center, .. } = target.shape() else {
        panic!("point geoms register point targets");
    };
    let tip = plot.tooltip(*center).unwrap();
    assert_eq!((tip.layer, tip.index), (0, 1));
    assert_eq!(tip.lines.len(), 1);
    assert_eq!(tip.lines[0].label.as_deref(), Some("value"));
    assert_eq!(tip.lines[0].value, "6");
}

#[test]
fn test_hidden_tooltips_no_lines() {
    let plot = build(
        "{'data': {'x': [1, 2], 'y': [1, 2]},
          'mapping': {'x': 'x', 'y': 'y'},
          'layers': [{'geom': 'point', 'tooltips': 'none'}]}",
    );
    let target = &plot.targets(0, 0)[0];
    let HitShape::Point { center, .. } = target.shape() else {
        panic!("point geoms register point targets");
    };
    assert!(plot.tooltip(*center).map_or(true, |t| t.lines.is_empty()));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_configuration_errors_propagate() {
    let unknown_geom = parse_plot_spec("{'layers': [{'geom': 'violin'}]}").unwrap().assembler();
    assert!(matches!(unknown_geom, Err(Error::InvalidSpec(m)) if m.contains("violin")));

    let bad_color = parse_plot_spec("{'layers': [{'geom': 'point', 'color': 'nocolor'}]}").unwrap().assembler();
    assert_eq!(bad_color.unwrap_err().to_string(), "Error parsing color value: 'nocolor'");

    let no_layers = parse_plot_spec("{'data': {'x': [1]}}").unwrap().assembler().unwrap().build();
    assert!(matches!(no_layers, Err(Error::InvalidSpec(_))));

    let missing_column = parse_plot_spec(
        "{'data': {'x': [1]}, 'mapping': {'x': 'nope'}, 'layers': [{'geom': 'point'}]}",
    )
    .unwrap()
    .assembler()
    .unwrap()
    .build();
    assert!(missing_column.is_err());
}
