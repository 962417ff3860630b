use crate::models::StyleOptions;

/// Builds the line-art instruction sent alongside the photo.
pub fn compose_prompt(options: StyleOptions) -> String {
    format!(
        "Convert this image into a black and white coloring page in line art style. \
         Draw it with {thickness}, and include {detail}. \
         Remove all shading, gradients, textures and color: use only pure black outlines \
         on a plain white background so the page can be printed and colored in.",
        thickness = options.thickness.phrase(),
        detail = options.detail.phrase(),
    )
}
